//! Tile kernel adapters.
//!
//! Each adapter turns one call of a [`kernels`](crate::kernels) routine into a task of a
//! [`Region`](crate::runtime::Region). It declares the tiles the kernel reads and writes, the
//! scratch memory it needs and its nominal flop count, then submits a job that runs the kernel on
//! views of those tiles.
//!
//! Adapters never run anything once the [`Sequence`](crate::Sequence) has failed. A kernel that
//! reports a numerical failure fails the sequence with the failure translated to global
//! coordinates.

pub mod blas;
pub mod copy;
pub mod lq;
