pub mod assemble_report;
pub mod deployer;
pub mod initial_weapons;
pub mod weed_cutter;
