/// Params every dogs service call receives: the REST request details.
pub type DogsParams = kennel_axum::params::RestParams;
