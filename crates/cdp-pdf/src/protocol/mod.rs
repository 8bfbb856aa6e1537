// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Protocol objects - the DevTools side of a conversion
//
// Architecture:
// - ProtocolSession owns the connection and the attached page target
// - PageDomain wraps the Page.* commands for that target
// - PageController sequences load and print with bounded waits
// - ConversionContext and Converter compose them into a single call

pub mod context;
pub mod converter;
pub mod page;
pub mod page_controller;
pub mod session;

pub use context::{ConversionContext, ConversionContextBuilder};
pub use converter::Converter;
pub use page::{FrameTree, NavigateResult, PageDomain, PrintToPdfParams, WaitUntil};
pub use page_controller::{LoadState, PageController};
pub use session::{EndpointKind, ProtocolSession, SessionState};
