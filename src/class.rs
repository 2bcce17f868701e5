//! Object classes and destructor dispatch.
//!
//! `ObjectClass` is a closed enumeration in bijection with the catalog class
//! oids, so both directions of the mapping are exhaustive matches and a new
//! class cannot be added without the compiler pointing at every place that
//! must learn about it, the destructor dispatch table included.

use crate::address::{ObjectAddress, Oid};
use crate::backend::{CatalogBackend, RelationKind};
use crate::constants::*;
use crate::error::{DependError, Result};
use serde::{Deserialize, Serialize};

/// Tag of the catalog class an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    Class,
    Proc,
    Type,
    Cast,
    Constraint,
    Conversion,
    Default,
    Language,
    Operator,
    OpClass,
    Rewrite,
    Trigger,
    Schema,
    Role,
    Database,
    Tablespace,
    Filespace,
    Filesystem,
    Fdw,
    ForeignServer,
    UserMapping,
    ExtProtocol,
    Compression,
}

/// Class tag for a catalog class oid.
pub fn object_class(class_id: Oid) -> Result<ObjectClass> {
    match class_id {
        RELATION_CLASS_ID => Ok(ObjectClass::Class),
        PROCEDURE_CLASS_ID => Ok(ObjectClass::Proc),
        TYPE_CLASS_ID => Ok(ObjectClass::Type),
        CAST_CLASS_ID => Ok(ObjectClass::Cast),
        CONSTRAINT_CLASS_ID => Ok(ObjectClass::Constraint),
        CONVERSION_CLASS_ID => Ok(ObjectClass::Conversion),
        ATTR_DEFAULT_CLASS_ID => Ok(ObjectClass::Default),
        LANGUAGE_CLASS_ID => Ok(ObjectClass::Language),
        OPERATOR_CLASS_ID => Ok(ObjectClass::Operator),
        OPCLASS_CLASS_ID => Ok(ObjectClass::OpClass),
        REWRITE_CLASS_ID => Ok(ObjectClass::Rewrite),
        TRIGGER_CLASS_ID => Ok(ObjectClass::Trigger),
        NAMESPACE_CLASS_ID => Ok(ObjectClass::Schema),
        AUTHID_CLASS_ID => Ok(ObjectClass::Role),
        DATABASE_CLASS_ID => Ok(ObjectClass::Database),
        TABLESPACE_CLASS_ID => Ok(ObjectClass::Tablespace),
        FILESPACE_CLASS_ID => Ok(ObjectClass::Filespace),
        FILESYSTEM_CLASS_ID => Ok(ObjectClass::Filesystem),
        FDW_CLASS_ID => Ok(ObjectClass::Fdw),
        FOREIGN_SERVER_CLASS_ID => Ok(ObjectClass::ForeignServer),
        USER_MAPPING_CLASS_ID => Ok(ObjectClass::UserMapping),
        EXT_PROTOCOL_CLASS_ID => Ok(ObjectClass::ExtProtocol),
        COMPRESSION_CLASS_ID => Ok(ObjectClass::Compression),
        other => Err(DependError::UnrecognizedObjectClass(other)),
    }
}

/// Catalog class oid for a class tag.
pub fn class_oid(class: ObjectClass) -> Oid {
    match class {
        ObjectClass::Class => RELATION_CLASS_ID,
        ObjectClass::Proc => PROCEDURE_CLASS_ID,
        ObjectClass::Type => TYPE_CLASS_ID,
        ObjectClass::Cast => CAST_CLASS_ID,
        ObjectClass::Constraint => CONSTRAINT_CLASS_ID,
        ObjectClass::Conversion => CONVERSION_CLASS_ID,
        ObjectClass::Default => ATTR_DEFAULT_CLASS_ID,
        ObjectClass::Language => LANGUAGE_CLASS_ID,
        ObjectClass::Operator => OPERATOR_CLASS_ID,
        ObjectClass::OpClass => OPCLASS_CLASS_ID,
        ObjectClass::Rewrite => REWRITE_CLASS_ID,
        ObjectClass::Trigger => TRIGGER_CLASS_ID,
        ObjectClass::Schema => NAMESPACE_CLASS_ID,
        ObjectClass::Role => AUTHID_CLASS_ID,
        ObjectClass::Database => DATABASE_CLASS_ID,
        ObjectClass::Tablespace => TABLESPACE_CLASS_ID,
        ObjectClass::Filespace => FILESPACE_CLASS_ID,
        ObjectClass::Filesystem => FILESYSTEM_CLASS_ID,
        ObjectClass::Fdw => FDW_CLASS_ID,
        ObjectClass::ForeignServer => FOREIGN_SERVER_CLASS_ID,
        ObjectClass::UserMapping => USER_MAPPING_CLASS_ID,
        ObjectClass::ExtProtocol => EXT_PROTOCOL_CLASS_ID,
        ObjectClass::Compression => COMPRESSION_CLASS_ID,
    }
}

/// Invoke the destructor for one object.
///
/// For relations this selects between index drop, column drop (`sub_id`
/// present), and full relation drop. Global objects (roles, databases,
/// tablespaces, filespaces, filesystems) are dropped through their own
/// commands and must never reach this table; hitting one here is a logic
/// error in the caller.
pub fn dispatch_drop<C: CatalogBackend>(catalog: &mut C, object: &ObjectAddress) -> Result<()> {
    match object_class(object.class_id)? {
        ObjectClass::Class => {
            if object.sub_id != 0 {
                return catalog.remove_column(object.object_id, object.sub_id);
            }
            let info = catalog.relation_info(object.object_id).ok_or(
                DependError::CacheLookupFailed {
                    catalog: "relation",
                    oid: object.object_id,
                },
            )?;
            if info.kind == RelationKind::Index {
                catalog.remove_index(object.object_id)
            } else {
                catalog.remove_relation(object.object_id)
            }
        }
        ObjectClass::Proc => catalog.remove_function(object.object_id),
        ObjectClass::Type => catalog.remove_type(object.object_id),
        ObjectClass::Cast => catalog.remove_cast(object.object_id),
        ObjectClass::Constraint => catalog.remove_constraint(object.object_id),
        ObjectClass::Conversion => catalog.remove_conversion(object.object_id),
        ObjectClass::Default => catalog.remove_attr_default(object.object_id),
        ObjectClass::Language => catalog.remove_language(object.object_id),
        ObjectClass::Operator => catalog.remove_operator(object.object_id),
        ObjectClass::OpClass => catalog.remove_opclass(object.object_id),
        ObjectClass::Rewrite => catalog.remove_rewrite_rule(object.object_id),
        ObjectClass::Trigger => catalog.remove_trigger(object.object_id),
        ObjectClass::Schema => catalog.remove_schema(object.object_id),
        ObjectClass::Fdw => catalog.remove_fdw(object.object_id),
        ObjectClass::ForeignServer => catalog.remove_foreign_server(object.object_id),
        ObjectClass::UserMapping => catalog.remove_user_mapping(object.object_id),
        ObjectClass::ExtProtocol => catalog.remove_protocol(object.object_id),

        class @ (ObjectClass::Role
        | ObjectClass::Database
        | ObjectClass::Tablespace
        | ObjectClass::Filespace
        | ObjectClass::Filesystem) => Err(DependError::UnhandledObjectClass(class)),

        ObjectClass::Compression => Err(DependError::Unsupported(
            "dropping a compression configuration",
        )),
    }
}
