//! # varinject - move literal values out of configuration models
//!
//! ## Introduction for developers
//!
//! Read this to understand how `varinject` works internally.
//!
//! ### Terms
//!
//! - a **model** is a yaml or json document, a tree of mappings, lists and scalars ([value::Value])
//! - a **folder** is a mapping key leading to a nested mapping, an **attribute** is a key leading to a value
//! - some folders hold **named instances**: their keys are names chosen by the author of the model
//!   (`Server: { AdminServer: {...}, ms1: {...} }`), not folder names
//!
//! Which folders hold named instances is not visible in the model itself. That knowledge comes
//! from a [schema::SchemaResolver], together with the canonical path of every folder.
//!
//! ```yaml
//! topology:
//!   Server:
//!     AdminServer:
//!       ListenPort: 7001
//!     ms1:
//!       ListenPort: 8001
//! ```
//!
//! ### Rules
//!
//! An injector rule ([rules::InjectorRule]) names attributes by their folder path: `Server.ListenPort`.
//! Walking the model ([traverse]) this rule visits every instance below `Server` and replaces the
//! value of `ListenPort` with a property token:
//!
//! | **location**                   | **variable name**             | **model value after**                  |
//! |--------------------------------|-------------------------------|----------------------------------------|
//! | `topology:/Server/AdminServer` | `Server.AdminServer.ListenPort` | `@@PROP:Server.AdminServer.ListenPort@@` |
//! | `topology:/Server/ms1`         | `Server.ms1.ListenPort`       | `@@PROP:Server.ms1.ListenPort@@`       |
//!
//! The replaced literals are collected in a [traverse::VariableMap]: `Server.ms1.ListenPort=8001`.
//!
//! A rule with a `regexp` only replaces the matching part of the value, see [transform].
//! Values that already are property tokens are never touched again, running the same rules twice
//! yields the same model.
//!
//! ### Rule selection
//!
//! Rules are not passed directly. An injector descriptor lists keywords, a keyword file maps those
//! to rule files ([keywords]). [injector::VariableInjector] loads all of them, applies the rules
//! and writes the variables via a [sink::VariableSink].
//!
//! ### Output
//!
//! When the variables were written the changed model is returned. Otherwise the model as it was
//! before injection is returned, even though rules may already have changed the working copy.
//!
pub mod files;
pub mod injector;
pub mod keywords;
pub mod location;
pub mod naming;
pub mod rules;
pub mod schema;
pub mod sink;
pub mod transform;
pub mod traverse;
pub mod value;
