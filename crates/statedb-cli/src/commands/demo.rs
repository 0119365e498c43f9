use statedb::DynStateStore;
use tracing::info;

/// Create a few keys, update one, delete one, then delete everything,
/// printing the state along the way.
pub fn run(state: &DynStateStore) -> anyhow::Result<()> {
    info!("running demo");

    state.create("name", "Audrow Nash")?;
    state.create("age", 28)?;
    state.create("email", "audrow@hey.com")?;

    println!("Number of keys set: {}", state.count()?);
    println!("Name: {}", state.get("name")?);
    println!("Age: {}", state.get("age")?);
    println!("Email: {}", state.get("email")?);

    println!("Setting age to 100");
    state.set("age", 100)?;
    println!("New age: {}", state.get("age")?);

    anyhow::ensure!(state.exists("email")?, "email should exist before delete");
    state.delete("email")?;
    anyhow::ensure!(!state.exists("email")?, "email should be gone after delete");

    println!("Deleting all keys");
    state.delete_all()?;
    println!("Number of keys set: {}", state.count()?);

    Ok(())
}
