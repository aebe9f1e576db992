pub mod inspect;

pub use self::inspect::ForgeInspect;
