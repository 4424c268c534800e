//! Script sandbox for `script` tokens.
//!
//! The engine only sees the [`ScriptSandbox`] trait; [`LuaSandbox`] backs it
//! with an embedded Lua 5.4 interpreter. Each run gets a fresh interpreter
//! that is dropped before `run` returns, on success and on fault alike.
//! Only the base, `string`, `table`, `math` and `utf8` libraries are loaded.

use crate::error::ScriptError;
use mlua::{Lua, LuaOptions, StdLib, Table, Value};
use std::collections::BTreeMap;
use token_core::{Token, TokenValue};

/// Read/write key-value table exposed to scripts as the global `state`.
pub type ScriptState = BTreeMap<String, String>;

/// Runs a script source against a state table and returns its result as text.
pub trait ScriptSandbox: Send + Sync {
    /// Execute `source`. On success `state` holds the table as the script
    /// left it; on error it is untouched.
    fn run(&self, source: &str, state: &mut ScriptState) -> Result<String, ScriptError>;
}

/// Lua-backed sandbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaSandbox;

impl ScriptSandbox for LuaSandbox {
    fn run(&self, source: &str, state: &mut ScriptState) -> Result<String, ScriptError> {
        let lua = Lua::new_with(
            StdLib::STRING | StdLib::TABLE | StdLib::MATH | StdLib::UTF8,
            LuaOptions::new(),
        )?;

        let table = lua.create_table()?;
        for (key, value) in state.iter() {
            table.set(key.as_str(), value.as_str())?;
        }
        lua.globals().set("state", table)?;

        let results: mlua::MultiValue = lua.load(source).eval()?;
        let output = match results.into_iter().last() {
            Some(value) => value_to_text(&lua, value)?.unwrap_or_default(),
            None => String::new(),
        };

        let updated: Option<Table> = lua.globals().get("state")?;
        let mut next = ScriptState::new();
        if let Some(table) = updated {
            for pair in table.pairs::<Value, Value>() {
                let (key, value) = pair?;
                let key = value_to_text(&lua, key)?;
                let value = value_to_text(&lua, value)?;
                if let (Some(key), Some(value)) = (key, value) {
                    next.insert(key, value);
                }
            }
        }
        *state = next;

        Ok(output)
    }
}

/// Strings and numbers coerce to text the way Lua's own `tostring` renders
/// them; every other Lua value has none.
fn value_to_text(lua: &Lua, value: Value) -> mlua::Result<Option<String>> {
    match value {
        Value::String(_) | Value::Integer(_) | Value::Number(_) => Ok(lua
            .coerce_string(value)?
            .map(|s| s.to_string_lossy().to_string())),
        _ => Ok(None),
    }
}

/// Initial state table for a token: its identity plus configured `init`.
pub fn seed_state(token: &Token) -> ScriptState {
    let mut state = ScriptState::new();
    state.insert("token".to_string(), token.name.clone());
    state.insert("sample".to_string(), token.sample.clone());
    if let TokenValue::Script { init, .. } = &token.value {
        state.extend(init.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    state
}

/// Sandbox plus the state table a script token runs against.
pub struct ScriptEnv<'a> {
    pub(crate) sandbox: &'a dyn ScriptSandbox,
    pub(crate) state: &'a mut ScriptState,
}

impl<'a> ScriptEnv<'a> {
    pub fn new(sandbox: &'a dyn ScriptSandbox, state: &'a mut ScriptState) -> Self {
        Self { sandbox, state }
    }
}
