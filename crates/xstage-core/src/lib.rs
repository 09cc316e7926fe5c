//! xstage Core Types and Definitions
//!
//! This crate provides the foundational types shared by every xstage crate:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Spans**: Byte ranges into the document source ([`span::Span`])
//! - **Document**: The read-only element tree of a scene file ([`document`] module)
//! - **Semantic**: Resource and usage entities backed by the tree ([`semantic`] module)

pub mod document;
pub mod identifier;
pub mod semantic;
pub mod span;
