use ethers::types::U256;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

macro_rules! impl_primitive_num {
    (pub struct $outer:ident($tname:ty)) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Serialize,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Deserialize,
            Shrinkwrap,
        )]
        pub struct $outer(pub $tname);

        impl std::fmt::Display for $outer {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$tname> for $outer {
            fn from(value: $tname) -> Self {
                Self(value)
            }
        }
    };
}

impl_primitive_num!(pub struct ChainId(u64));
impl_primitive_num!(pub struct WeaponId(U256));

impl ChainId {
    pub fn is_dev_chain(&self) -> bool {
        crate::config::DEV_CHAIN_IDS.contains(&self.0)
    }
}
