use statedb::DynStateStore;

use super::parse_value;

pub fn exists(state: &DynStateStore, key: &str) -> anyhow::Result<()> {
    println!("{}", state.exists(key)?);
    Ok(())
}

pub fn is_set(state: &DynStateStore, key: &str) -> anyhow::Result<()> {
    println!("{}", state.is_set(key)?);
    Ok(())
}

pub fn create(state: &DynStateStore, key: &str, raw: &str, timestamp: bool) -> anyhow::Result<()> {
    state.create(key, parse_value(raw, timestamp)?)?;
    println!("✓ Created {key}");
    Ok(())
}

pub fn get(state: &DynStateStore, key: &str) -> anyhow::Result<()> {
    let value = state.get(key)?;
    println!("{}", serde_json::to_string(&value.to_json())?);
    Ok(())
}

pub fn set(state: &DynStateStore, key: &str, raw: &str, timestamp: bool) -> anyhow::Result<()> {
    state.set(key, parse_value(raw, timestamp)?)?;
    println!("✓ Updated {key}");
    Ok(())
}

pub fn delete(state: &DynStateStore, key: &str) -> anyhow::Result<()> {
    state.delete(key)?;
    println!("✓ Deleted {key}");
    Ok(())
}

pub fn delete_all(state: &DynStateStore) -> anyhow::Result<()> {
    state.delete_all()?;
    println!("✓ Deleted all keys");
    Ok(())
}

pub fn clear(state: &DynStateStore, key: &str) -> anyhow::Result<()> {
    state.clear(key)?;
    println!("✓ Cleared {key}");
    Ok(())
}

pub fn clear_all(state: &DynStateStore) -> anyhow::Result<()> {
    state.clear_all()?;
    println!("✓ Cleared all keys");
    Ok(())
}

pub fn count(state: &DynStateStore) -> anyhow::Result<()> {
    println!("{}", state.count()?);
    Ok(())
}

pub fn list(state: &DynStateStore) -> anyhow::Result<()> {
    let all: serde_json::Map<String, serde_json::Value> = state
        .get_all()?
        .into_iter()
        .map(|(key, value)| (key, value.to_json()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&all)?);
    Ok(())
}
