//! Human-readable object descriptions for diagnostics.
//!
//! These are the phrases that end up in cascade notices and drop refusals:
//! "table public.users", "column email of view active_users", "default for
//! column id of table users". Relations are schema-qualified only when they
//! are not visible in the active search path, so messages read the way the
//! user would have typed the name.

use crate::address::{ObjectAddress, Oid};
use crate::backend::CatalogReader;
use crate::class::{ObjectClass, object_class};
use crate::error::{DependError, Result};

fn lookup<T>(value: Option<T>, catalog: &'static str, oid: Oid) -> Result<T> {
    value.ok_or(DependError::CacheLookupFailed { catalog, oid })
}

/// Describe a relation, qualified with its schema when it is not visible in
/// the search path, with sub-object handling for columns.
fn relation_description<C: CatalogReader>(
    reader: &C,
    oid: Oid,
    sub_id: u32,
) -> Result<String> {
    let info = lookup(reader.relation_info(oid), "relation", oid)?;
    let name = if info.visible {
        info.name.clone()
    } else {
        format!("{}.{}", info.schema, info.name)
    };
    let whole = format!("{} {}", info.kind.label(), name);
    if sub_id == 0 {
        return Ok(whole);
    }
    let column = lookup(reader.attribute_name(oid, sub_id), "attribute", oid)?;
    Ok(format!("column {column} of {whole}"))
}

/// Render the diagnostic phrase for one object address.
pub fn object_description<C: CatalogReader>(
    reader: &C,
    object: &ObjectAddress,
) -> Result<String> {
    let oid = object.object_id;
    match object_class(object.class_id)? {
        ObjectClass::Class => relation_description(reader, oid, object.sub_id),
        ObjectClass::Proc => {
            let signature = lookup(reader.function_signature(oid), "function", oid)?;
            Ok(format!("function {signature}"))
        }
        ObjectClass::Type => {
            let name = lookup(reader.type_name(oid), "type", oid)?;
            Ok(format!("type {name}"))
        }
        ObjectClass::Cast => {
            let (source, target) = lookup(reader.cast_types(oid), "cast", oid)?;
            let source = lookup(reader.type_name(source), "type", source)?;
            let target = lookup(reader.type_name(target), "type", target)?;
            Ok(format!("cast from {source} to {target}"))
        }
        ObjectClass::Constraint => {
            let (name, relation) = lookup(reader.constraint_info(oid), "constraint", oid)?;
            match relation {
                Some(rel) => {
                    let on = relation_description(reader, rel, 0)?;
                    Ok(format!("constraint {name} on {on}"))
                }
                None => Ok(format!("constraint {name}")),
            }
        }
        ObjectClass::Conversion => {
            let name = lookup(reader.conversion_name(oid), "conversion", oid)?;
            Ok(format!("conversion {name}"))
        }
        ObjectClass::Default => {
            let (relation, attnum) =
                lookup(reader.attr_default_target(oid), "attrdef", oid)?;
            let column = relation_description(reader, relation, attnum)?;
            Ok(format!("default for {column}"))
        }
        ObjectClass::Language => {
            let name = lookup(reader.language_name(oid), "language", oid)?;
            Ok(format!("language {name}"))
        }
        ObjectClass::Operator => {
            let signature = lookup(reader.operator_signature(oid), "operator", oid)?;
            Ok(format!("operator {signature}"))
        }
        ObjectClass::OpClass => {
            let info = lookup(reader.opclass_info(oid), "operator class", oid)?;
            Ok(format!(
                "operator class {} for access method {}",
                info.name, info.access_method
            ))
        }
        ObjectClass::Rewrite => {
            let (name, relation) = lookup(reader.rewrite_info(oid), "rewrite rule", oid)?;
            let on = relation_description(reader, relation, 0)?;
            Ok(format!("rule {name} on {on}"))
        }
        ObjectClass::Trigger => {
            let (name, relation) = lookup(reader.trigger_info(oid), "trigger", oid)?;
            let on = relation_description(reader, relation, 0)?;
            Ok(format!("trigger {name} on {on}"))
        }
        ObjectClass::Schema => {
            let name = lookup(reader.schema_name(oid), "schema", oid)?;
            Ok(format!("schema {name}"))
        }
        ObjectClass::Role => {
            let name = lookup(reader.role_name(oid), "role", oid)?;
            Ok(format!("role {name}"))
        }
        ObjectClass::Database => {
            let name = lookup(reader.database_name(oid), "database", oid)?;
            Ok(format!("database {name}"))
        }
        ObjectClass::Tablespace => {
            let name = lookup(reader.tablespace_name(oid), "tablespace", oid)?;
            Ok(format!("tablespace {name}"))
        }
        ObjectClass::Filespace => {
            let name = lookup(reader.filespace_name(oid), "filespace", oid)?;
            Ok(format!("filespace {name}"))
        }
        ObjectClass::Filesystem => {
            let name = lookup(reader.filesystem_name(oid), "filesystem", oid)?;
            Ok(format!("filesystem {name}"))
        }
        ObjectClass::Fdw => {
            let name = lookup(reader.fdw_name(oid), "foreign-data wrapper", oid)?;
            Ok(format!("foreign-data wrapper {name}"))
        }
        ObjectClass::ForeignServer => {
            let name = lookup(reader.foreign_server_name(oid), "foreign server", oid)?;
            Ok(format!("server {name}"))
        }
        ObjectClass::UserMapping => {
            let user = lookup(reader.user_mapping_user(oid), "user mapping", oid)?;
            Ok(format!("user mapping for {user}"))
        }
        ObjectClass::ExtProtocol => {
            let name = lookup(reader.protocol_name(oid), "protocol", oid)?;
            Ok(format!("protocol {name}"))
        }
        ObjectClass::Compression => {
            let name = lookup(
                reader.compression_name(oid),
                "compression configuration",
                oid,
            )?;
            Ok(format!("compression configuration {name}"))
        }
    }
}
