#![forbid(unsafe_code)]
#![warn(clippy::dbg_macro, clippy::use_debug)]

pub use sea_orm_migration::prelude::*;

pub struct Migrator;

mod m20250402_110500_kitchen_race_init;
mod m20250518_164230_response_review_metadata;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250402_110500_kitchen_race_init::Migration),
            Box::new(m20250518_164230_response_review_metadata::Migration),
        ]
    }
}
