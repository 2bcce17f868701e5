//! Well-known catalog oids.
//!
//! Class oids identify the catalog a dependency endpoint lives in and are
//! part of the persistent edge format, so they must stay stable. The values
//! match the upstream catalogs where one exists; the extended classes
//! (filespaces, filesystems, external protocols, compression configurations)
//! use locally assigned oids in the same numbering style.

use crate::address::Oid;

// Catalog class oids (one per ObjectClass variant).
pub const RELATION_CLASS_ID: Oid = 1259; // pg_class
pub const PROCEDURE_CLASS_ID: Oid = 1255; // pg_proc
pub const TYPE_CLASS_ID: Oid = 1247; // pg_type
pub const CAST_CLASS_ID: Oid = 2605; // pg_cast
pub const CONSTRAINT_CLASS_ID: Oid = 2606; // pg_constraint
pub const CONVERSION_CLASS_ID: Oid = 2607; // pg_conversion
pub const ATTR_DEFAULT_CLASS_ID: Oid = 2604; // pg_attrdef
pub const LANGUAGE_CLASS_ID: Oid = 2612; // pg_language
pub const OPERATOR_CLASS_ID: Oid = 2617; // pg_operator
pub const OPCLASS_CLASS_ID: Oid = 2616; // pg_opclass
pub const REWRITE_CLASS_ID: Oid = 2618; // pg_rewrite
pub const TRIGGER_CLASS_ID: Oid = 2620; // pg_trigger
pub const NAMESPACE_CLASS_ID: Oid = 2615; // pg_namespace
pub const AUTHID_CLASS_ID: Oid = 1260; // pg_authid
pub const DATABASE_CLASS_ID: Oid = 1262; // pg_database
pub const TABLESPACE_CLASS_ID: Oid = 1213; // pg_tablespace
pub const FILESPACE_CLASS_ID: Oid = 5009; // pg_filespace
pub const FILESYSTEM_CLASS_ID: Oid = 7076; // pg_filesystem
pub const FDW_CLASS_ID: Oid = 2328; // pg_foreign_data_wrapper
pub const FOREIGN_SERVER_CLASS_ID: Oid = 1417; // pg_foreign_server
pub const USER_MAPPING_CLASS_ID: Oid = 1418; // pg_user_mapping
pub const EXT_PROTOCOL_CLASS_ID: Oid = 7175; // pg_extprotocol
pub const COMPRESSION_CLASS_ID: Oid = 3220; // pg_compression

// Object-identifier type oids recognised by the expression scanner. A
// constant of one of these types names another catalog object by oid, so
// the scanner records a dependency on the named object as well as on the
// type itself.
pub const REGPROC_TYPE_ID: Oid = 24;
pub const REGPROCEDURE_TYPE_ID: Oid = 2202;
pub const REGOPER_TYPE_ID: Oid = 2203;
pub const REGOPERATOR_TYPE_ID: Oid = 2204;
pub const REGCLASS_TYPE_ID: Oid = 2205;
pub const REGTYPE_TYPE_ID: Oid = 2206;

/// The invalid oid: "no object", and the zeroed dependent side of PIN edges.
pub const INVALID_OID: Oid = 0;
