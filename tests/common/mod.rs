//! Shared fixtures for the integration tests.
#![allow(dead_code)] // not every test target uses every helper

use pgdepend::constants::{
    ATTR_DEFAULT_CLASS_ID, PROCEDURE_CLASS_ID, RELATION_CLASS_ID, TYPE_CLASS_ID,
};
use pgdepend::{MemoryCatalog, ObjectAddress, Oid};
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

/// Route engine diagnostics through a subscriber when RUST_LOG asks for
/// them; repeated calls are fine.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

pub fn relation(oid: Oid) -> ObjectAddress {
    ObjectAddress::whole(RELATION_CLASS_ID, oid)
}

pub fn column(oid: Oid, attnum: u32) -> ObjectAddress {
    ObjectAddress::new(RELATION_CLASS_ID, oid, attnum)
}

pub fn function(oid: Oid) -> ObjectAddress {
    ObjectAddress::whole(PROCEDURE_CLASS_ID, oid)
}

pub fn type_object(oid: Oid) -> ObjectAddress {
    ObjectAddress::whole(TYPE_CLASS_ID, oid)
}

pub fn attr_default(oid: Oid) -> ObjectAddress {
    ObjectAddress::whole(ATTR_DEFAULT_CLASS_ID, oid)
}

/// The destructor invocations as an unordered set.
pub fn drop_set(catalog: &MemoryCatalog) -> HashSet<ObjectAddress> {
    catalog.drop_log.iter().copied().collect()
}
