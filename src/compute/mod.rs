//! Algorithm drivers.
//!
//! A driver walks the tile grid of its operands and submits the tile operations of one
//! linear-algebra routine, with the tile coordinates and scalar coefficients of each step, through
//! the [`tile_ops`](crate::tile_ops) adapters. Drivers do not validate their arguments, see the
//! `*_tile_async` functions of [`api`](crate::api) for that.
//!
//! Every driver returns without submitting anything if the [`Sequence`](crate::Sequence) has
//! failed, and checks it again before every step of its outer loop.

pub mod band;
pub mod gelqf;
pub mod her2k;
pub mod lascl;
pub mod layout;
pub mod pbtrf;
pub mod tbsm;
pub mod unmlq;

pub use band::{desc2pb, pb2desc};
pub use gelqf::gelqf;
pub use her2k::her2k;
pub use lascl::lascl;
pub use layout::{desc2ge, ge2desc};
pub use pbtrf::pbtrf;
pub use tbsm::tbsm;
pub use unmlq::unmlq;

use crate::assert;
use crate::desc::{Tile, TileMatrix};
use crate::scalar::ComplexField;

/// Handle to a tile that the traversal guarantees to be stored.
#[track_caller]
#[inline]
pub(crate) fn tile<E: ComplexField>(a: &TileMatrix<E>, i: usize, j: usize) -> Tile<E> {
    let tile = a.tile(i, j);
    assert!(tile.is_some());
    match tile {
        Some(tile) => tile,
        None => unreachable!(),
    }
}
