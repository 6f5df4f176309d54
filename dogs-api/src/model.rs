use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted dog. The id is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: i64,
    pub age: i64,
    pub name: String,
    pub description: String,
    pub breed: String,
}

/// Every field a new dog needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDog {
    #[serde(deserialize_with = "whole_number")]
    pub age: i64,
    pub name: String,
    pub description: String,
    pub breed: String,
}

impl NewDog {
    pub fn into_dog(self, id: i64) -> Dog {
        Dog {
            id,
            age: self.age,
            name: self.name,
            description: self.description,
            breed: self.breed,
        }
    }
}

/// An integer from any JSON number without a fractional part, so `3.0`
/// reads as `3`.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(deserializer)?;
    n.as_i64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| D::Error::custom(format!("age {n} is not a whole number")))
}

/// A partial update: `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DogPatch {
    pub age: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub breed: Option<String>,
}

impl DogPatch {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.name.is_none() && self.description.is_none() && self.breed.is_none()
    }

    pub fn apply(self, dog: &mut Dog) {
        if let Some(age) = self.age {
            dog.age = age;
        }
        if let Some(name) = self.name {
            dog.name = name;
        }
        if let Some(description) = self.description {
            dog.description = description;
        }
        if let Some(breed) = self.breed {
            dog.breed = breed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rex() -> Dog {
        NewDog {
            age: 3,
            name: "Rex".into(),
            description: "friendly".into(),
            breed: "lab".into(),
        }
        .into_dog(1)
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let mut dog = rex();
        DogPatch {
            age: Some(5),
            ..DogPatch::default()
        }
        .apply(&mut dog);

        assert_eq!(dog.age, 5);
        assert_eq!(dog.name, "Rex");
        assert_eq!(dog.description, "friendly");
        assert_eq!(dog.breed, "lab");
    }

    #[test]
    fn new_dog_age_must_be_whole() {
        let mut body = serde_json::json!({"age": 3.0, "name": "Rex", "description": "friendly", "breed": "lab"});
        let dog: NewDog = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(dog.age, 3);

        body["age"] = serde_json::json!(3.5);
        assert!(serde_json::from_value::<NewDog>(body).is_err());
    }

    #[test]
    fn patch_from_json_keeps_absent_fields_none() {
        let patch: DogPatch = serde_json::from_value(serde_json::json!({"breed": "pug"})).unwrap();
        assert_eq!(patch.breed.as_deref(), Some("pug"));
        assert!(patch.age.is_none());
        assert!(!patch.is_empty());
        assert!(DogPatch::default().is_empty());
    }
}
