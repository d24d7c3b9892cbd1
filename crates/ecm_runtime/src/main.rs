//! ECM Runtime
//!
//! Demo binary that drives the entity component manager through its
//! reference scenarios and logs the results.

mod settings;

use anyhow::Result;
use ecm_core::components::{LinearAcceleration, LinearVelocity, Position};
use ecm_core::ecs::{Ecm, Entity};
use ecm_core::glam::IVec3;
use settings::RuntimeSettings;

fn main() -> Result<()> {
    let settings = RuntimeSettings::load()?;
    tracing_subscriber::fmt()
        .with_max_level(settings.level()?)
        .init();

    tracing::info!("ECM v{}", ecm_core::VERSION);
    tracing::debug!(?settings, "loaded settings");

    let mut ecm = Ecm::new();
    let entities = populate(&mut ecm, settings.entity_count)?;

    run_callbacks(&mut ecm, settings.print_components)?;
    tracing::info!(views = ecm.view_count(), "views after callback passes");

    remove_and_restore(&mut ecm, &entities)?;
    spawn_late(&mut ecm)?;
    tracing::info!(views = ecm.view_count(), "views after all passes");

    for (name, value) in ecm.counters().iter() {
        tracing::info!(counter = name, value, "view cache counter");
    }
    Ok(())
}

/// Create entities carrying position, velocity and acceleration `(i, i, i)`.
fn populate(ecm: &mut Ecm, count: usize) -> Result<Vec<Entity>> {
    (0..count)
        .map(|i| -> Result<Entity> {
            let value = IVec3::splat(i32::try_from(i)?);
            let entity = ecm_core::spawn!(
                ecm,
                Position::new(value),
                LinearVelocity::new(value),
                LinearAcceleration::new(value)
            )?;
            Ok(entity)
        })
        .collect()
}

/// Five passes, each with a distinct ordered component list.
fn run_callbacks(ecm: &mut Ecm, print: bool) -> Result<()> {
    ecm.each::<(Position, LinearVelocity, LinearAcceleration), _>(|entity, (pos, vel, acc)| {
        if print {
            tracing::info!(%entity, position = ?pos.data, linear_velocity = ?vel.data,
                linear_acceleration = ?acc.data, "components");
        }
        true
    })?;

    tracing::info!("updating component data");
    ecm.each::<(Position,), _>(|_, (pos,)| {
        pos.data += IVec3::ONE;
        true
    })?;
    ecm.each::<(LinearVelocity,), _>(|_, (vel,)| {
        vel.data += IVec3::ONE;
        true
    })?;
    ecm.each::<(LinearAcceleration,), _>(|_, (acc,)| {
        acc.data += IVec3::ONE;
        true
    })?;

    ecm.each::<(LinearVelocity, Position, LinearAcceleration), _>(|entity, (vel, pos, acc)| {
        if print {
            tracing::info!(%entity, position = ?pos.data, linear_velocity = ?vel.data,
                linear_acceleration = ?acc.data, "updated components");
        }
        true
    })?;
    Ok(())
}

/// Remove position, velocity and acceleration from the first three
/// entities (one kind each), log the joins, then restore the kinds.
fn remove_and_restore(ecm: &mut Ecm, entities: &[Entity]) -> Result<()> {
    for (i, &entity) in entities.iter().take(3).enumerate() {
        match i {
            0 => ecm.remove_component::<Position>(entity)?,
            1 => ecm.remove_component::<LinearVelocity>(entity)?,
            _ => ecm.remove_component::<LinearAcceleration>(entity)?,
        }
        tracing::info!(%entity, removed = kind_removed(i), "removed component");
    }

    let all = members(ecm)?;
    tracing::info!(members = ?all, "position, velocity and acceleration after removal");
    let moving = moving_members(ecm)?;
    tracing::info!(members = ?moving, "position and velocity after removal");

    for (i, &entity) in entities.iter().take(3).enumerate() {
        match i {
            0 => ecm.add_component(entity, Position::default())?,
            1 => ecm.add_component(entity, LinearVelocity::default())?,
            _ => ecm.add_component(entity, LinearAcceleration::default())?,
        }
    }
    let restored = members(ecm)?;
    tracing::info!(members = ?restored, "position, velocity and acceleration after restoring");
    Ok(())
}

fn kind_removed(i: usize) -> &'static str {
    match i {
        0 => "Position",
        1 => "LinearVelocity",
        _ => "LinearAcceleration",
    }
}

/// Create an entity after the views exist; it joins on the next pass.
fn spawn_late(ecm: &mut Ecm) -> Result<()> {
    let late = ecm_core::spawn!(ecm, Position::default(), LinearVelocity::default())?;
    tracing::info!(%late, "created entity with position and velocity");

    let moving = moving_members(ecm)?;
    tracing::info!(members = ?moving, "position and velocity after late spawn");
    Ok(())
}

fn members(ecm: &mut Ecm) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    ecm.each::<(Position, LinearVelocity, LinearAcceleration), _>(|entity, _| {
        ids.push(entity.id());
        true
    })?;
    Ok(ids)
}

fn moving_members(ecm: &mut Ecm) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    ecm.each::<(Position, LinearVelocity), _>(|entity, _| {
        ids.push(entity.id());
        true
    })?;
    Ok(ids)
}
