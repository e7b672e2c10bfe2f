//! ECS resources and external collaborators.
//!
//! Submodules overview:
//! - [`matrixstack`] – matrix-stack contract plus software and rlgl backends
//! - [`rendercontext`] – resource owning the active matrix stack
//! - [`transformconfig`] – degenerate-scale policy loaded from INI
//! - [`scenedescription`] – JSON scene files spawned into a world

pub mod matrixstack;
pub mod rendercontext;
pub mod scenedescription;
pub mod transformconfig;
