//! Test fixtures for conform
//!
//! Representative resource schemas of a storage management API (network
//! interfaces, DNS, SCSI bus and SMART settings) plus request payloads that
//! pass or fail them.

use std::net::Ipv4Addr;

use anyhow::Context;
use conform_core::{BuildError, Kind, Value};
use conform_runtime::{Schema, SchemaNode};
use serde_json::json;

/// SMART self-test types accepted by `smartctl -t`.
pub const SMART_TEST_TYPES: [&str; 4] = ["offline", "short", "long", "conveyance"];

/// SCSI rescan request as an operator would write it in a YAML file.
pub const SCSI_RESCAN_YAML: &str = r#"
host: [0, "1"]
luns: ["3"]
remove: true
"#;

/// Dotted-quad IPv4 address given as a string.
pub fn ipv4() -> SchemaNode {
    SchemaNode::predicate("is_ipv4", |v| {
        v.as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok())
    })
}

/// Integer given either as a number or as its decimal string.
pub fn int_like() -> Result<SchemaNode, BuildError> {
    let parse = SchemaNode::transform("parse_int", |v| {
        let text = v.as_str().context("expected a decimal string")?;
        Ok(Value::Int(text.trim().parse::<i64>()?))
    });
    SchemaNode::or([SchemaNode::of(Kind::Int), parse])
}

/// Demonstration schema mixing literals, transforms, combinators and a
/// wildcard key.
pub fn demo_schema() -> Result<Schema, BuildError> {
    let percentage = SchemaNode::and([
        SchemaNode::of(Kind::Int),
        SchemaNode::predicate("in_range", |v| v.as_int().is_some_and(|n| 0 < n && n < 100)),
    ])?;
    let parse = SchemaNode::transform("parse_int", |v| match v {
        Value::Str(s) => Ok(Value::Int(s.parse()?)),
        other => Ok(other.clone()),
    });

    Ok(Schema::new(SchemaNode::map([
        (SchemaNode::from("key1"), SchemaNode::of(Kind::Str)),
        (SchemaNode::from("key2"), SchemaNode::of(Kind::Int)),
        (SchemaNode::from("key3"), parse),
        (SchemaNode::from("key4"), percentage),
        (
            SchemaNode::optional("key5")?,
            SchemaNode::default(Kind::Str, "value5")?,
        ),
        (SchemaNode::optional(Kind::Str)?, SchemaNode::of(Kind::Any)),
    ])))
}

/// Payload accepted by [`demo_schema`].
pub fn demo_payload() -> Value {
    Value::from(json!({
        "key1": "value1",
        "key2": 222,
        "key3": "333",
        "key4": 44,
        "key_none": null,
        "key_none2": "null"
    }))
}

/// Static IP configuration of a network interface.
pub fn ip_config_schema() -> Result<Schema, BuildError> {
    Ok(Schema::new(SchemaNode::map([
        (SchemaNode::from("ip"), ipv4()),
        (SchemaNode::from("netmask"), ipv4()),
        (
            SchemaNode::optional("gateway")?,
            SchemaNode::default(ipv4(), "0.0.0.0")?,
        ),
    ])))
}

/// Name server list for the resolver configuration.
pub fn dns_servers_schema() -> Schema {
    Schema::new(SchemaNode::map([(
        SchemaNode::from("servers"),
        SchemaNode::list([ipv4()]),
    )]))
    .with_error("servers must be a list of IPv4 addresses")
}

/// Bus rescan request. Every selector is optional and defaults to empty.
pub fn scsi_rescan_schema() -> Result<Schema, BuildError> {
    let selector = || -> Result<SchemaNode, BuildError> {
        SchemaNode::default(SchemaNode::list([int_like()?]), Value::List(Vec::new()))
    };
    let flag = || SchemaNode::default_derived(Kind::Bool);

    Ok(Schema::new(SchemaNode::map([
        (SchemaNode::optional("host")?, selector()?),
        (SchemaNode::optional("channels")?, selector()?),
        (SchemaNode::optional("targets")?, selector()?),
        (SchemaNode::optional("luns")?, selector()?),
        (SchemaNode::optional("remove")?, flag()?),
        (SchemaNode::optional("force_rescan")?, flag()?),
        (SchemaNode::optional("force_remove")?, flag()?),
    ])))
}

/// SMART settings. Absent switches are left untouched, so nothing is
/// injected.
pub fn smart_config_schema() -> Result<Schema, BuildError> {
    Ok(Schema::new(SchemaNode::map([
        (SchemaNode::optional("smart_enabled")?, SchemaNode::of(Kind::Bool)),
        (SchemaNode::optional("offline_auto")?, SchemaNode::of(Kind::Bool)),
    ])))
}

/// SMART self-test request.
pub fn smart_test_schema() -> Result<Schema, BuildError> {
    let test_type = SchemaNode::or(SMART_TEST_TYPES)?.with_error("unsupported test_type");
    Ok(Schema::new(SchemaNode::map([(SchemaNode::from("test_type"), test_type)])))
}

/// Parse [`SCSI_RESCAN_YAML`] into a payload.
pub fn scsi_rescan_payload() -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(SCSI_RESCAN_YAML)
}
