pub mod entity;
pub mod outcome;
pub mod phys;
pub mod pool;
pub mod projectile;
pub mod resources;
pub mod searcher;
pub mod skill;
pub mod unit;

pub use self::{
    entity::*,
    outcome::*,
    phys::*,
    pool::*,
    projectile::*,
    resources::*,
    searcher::*,
    skill::*,
    unit::*,
};
