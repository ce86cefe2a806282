//! Loader: read local JSON inputs (store set, optional parameter file), check
//! their shape, keep their order and return typed values. No network I/O.
//!
//! Accepted store-set shapes (object order is significant):
//! - `{ "<store>": { "quantity": n, "competitors": { "<name>": null | n, ... } } }`
//! - `competitors` as an array of names (all unset)
//! - legacy Portuguese spellings `QuantidadeProdutosPesquisa` / `Concorrentes`
//! - an envelope `{ "params": {...}, "stores": {...} }`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use fair_core::{CompetitorName, Params, Store, StoreName, StoreSet};

use crate::{hasher, IoError, IoResult};

/// Inputs larger than this are rejected before parsing.
pub const MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;

const ENVELOPE_STORES: &str = "stores";
const ENVELOPE_PARAMS: &str = "params";

/// Parsed input file plus its digest.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub stores: StoreSet,
    /// Parameters embedded through the envelope form, if any.
    pub params: Option<Params>,
    /// SHA-256 of the canonical JSON of the whole file.
    pub input_sha256: String,
}

// ----------------------------- Raw wire types -----------------------------

#[derive(Deserialize)]
struct RawStore {
    #[serde(alias = "QuantidadeProdutosPesquisa")]
    quantity: u64,
    #[serde(alias = "Concorrentes")]
    competitors: RawCompetitors,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCompetitors {
    Names(Vec<String>),
    Amounts(Map<String, Value>),
}

// ----------------------------- Entry points -----------------------------

pub fn load_input(path: &Path) -> IoResult<LoadedInput> {
    let v = read_json_value_with_limits(path)?;
    parse_input(&v)
}

pub fn load_params(path: &Path) -> IoResult<Params> {
    let v = read_json_value_with_limits(path)?;
    parse_params(&v, "")
}

/// Read a JSON file, refusing anything above `MAX_INPUT_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let f = File::open(path).map_err(IoError::Read)?;
    let len = f.metadata().map_err(IoError::Read)?.len();
    if len > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!(
            "{} is {len} bytes (max {MAX_INPUT_BYTES})",
            path.display()
        )));
    }
    let mut buf = Vec::with_capacity(len as usize);
    f.take(MAX_INPUT_BYTES + 1).read_to_end(&mut buf).map_err(IoError::Read)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!("{} grew past {MAX_INPUT_BYTES} bytes", path.display())));
    }
    Ok(serde_json::from_slice(&buf)?)
}

pub fn parse_input(v: &Value) -> IoResult<LoadedInput> {
    let root = as_object(v, "")?;
    let input_sha256 = hasher::sha256_canonical_value(v)?;

    if is_envelope(root) {
        let stores = match root.get(ENVELOPE_STORES) {
            Some(s) => parse_store_set_at(s, "/stores")?,
            None => StoreSet::new(),
        };
        let params = match root.get(ENVELOPE_PARAMS) {
            Some(p) => Some(parse_params(p, "/params")?),
            None => None,
        };
        return Ok(LoadedInput { stores, params, input_sha256 });
    }

    Ok(LoadedInput { stores: parse_store_set_at(v, "")?, params: None, input_sha256 })
}

pub fn parse_store_set(v: &Value) -> IoResult<StoreSet> {
    parse_store_set_at(v, "")
}

// ----------------------------- Internals -----------------------------

/// Envelope iff the only top-level keys are `stores` / `params` and `stores`
/// holds an object of objects. A lone store named `stores` has scalar fields
/// (`quantity`) and stays a plain store set.
fn is_envelope(root: &Map<String, Value>) -> bool {
    let stores_are_objects = match root.get(ENVELOPE_STORES) {
        Some(Value::Object(inner)) => inner.values().all(Value::is_object),
        _ => false,
    };
    stores_are_objects && root.keys().all(|k| k == ENVELOPE_STORES || k == ENVELOPE_PARAMS)
}

fn parse_store_set_at(v: &Value, base: &str) -> IoResult<StoreSet> {
    let root = as_object(v, base)?;
    let mut set = StoreSet::new();

    for (name, entry) in root {
        let ptr = format!("{base}/{}", pointer_token(name));
        let raw: RawStore = serde_json::from_value(entry.clone())
            .map_err(|e| IoError::Json { pointer: ptr.clone(), msg: e.to_string() })?;
        let store_name = StoreName::new(name.as_str()).map_err(|e| shape(&ptr, e))?;
        let mut store = Store::new(store_name, raw.quantity);

        match raw.competitors {
            RawCompetitors::Names(names) => {
                for (i, c) in names.into_iter().enumerate() {
                    let at = format!("{ptr}/competitors/{i}");
                    let comp = CompetitorName::new(c).map_err(|e| shape(&at, e))?;
                    store.add_competitor(comp, None).map_err(|e| shape(&at, e))?;
                }
            }
            RawCompetitors::Amounts(map) => {
                for (c, amount) in map {
                    let at = format!("{ptr}/competitors/{}", pointer_token(&c));
                    let amount = match amount {
                        Value::Null => None,
                        other => Some(other.as_u64().ok_or_else(|| {
                            shape(&at, format!("amount must be null or a non-negative integer, got {other}"))
                        })?),
                    };
                    let comp = CompetitorName::new(c).map_err(|e| shape(&at, e))?;
                    store.add_competitor(comp, amount).map_err(|e| shape(&at, e))?;
                }
            }
        }
        set.push(store).map_err(|e| shape(&ptr, e))?;
    }
    Ok(set)
}

fn parse_params(v: &Value, pointer: &str) -> IoResult<Params> {
    let params: Params = serde_json::from_value(v.clone()).map_err(|e| IoError::Json {
        pointer: if pointer.is_empty() { "/".into() } else { pointer.into() },
        msg: e.to_string(),
    })?;
    params.validate_domains().map_err(|e| shape(pointer, e))?;
    Ok(params)
}

fn as_object<'a>(v: &'a Value, pointer: &str) -> Result<&'a Map<String, Value>, IoError> {
    v.as_object().ok_or_else(|| shape(pointer, "expected an object keyed by store name"))
}

fn shape(pointer: &str, msg: impl ToString) -> IoError {
    IoError::Shape {
        pointer: if pointer.is_empty() { "/".into() } else { pointer.into() },
        msg: msg.to_string(),
    }
}

/// RFC 6901 escaping of one reference token.
fn pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}
