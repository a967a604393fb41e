// HTTP handlers
//
// resource: generic catalog routes, one set per ResourceSpec
// stores:   tenant management for the signed-in owner
// system:   service description and health
pub mod guard;
pub mod resource;
pub mod stores;
pub mod system;
