#![deny(warnings)]

//! Presentation adapter for the lab pages.
//!
//! Turns input records and scenario stages into formatted views: statement
//! tables, chart series, status badges and warnings. A [`LabSession`] keeps
//! one user's edits and picks which view to build; nothing here holds derived
//! values between calls.

pub mod badge;
pub mod chart;
pub mod format;
pub mod session;
pub mod statement;
mod text;
pub mod view;

pub use badge::{Badge, Tone};
pub use chart::{Bar, Measure, Point, Series, WaterfallStep};
pub use format::Formatter;
pub use session::{Activity, LabSession, Page, SessionError};
pub use statement::{RowKind, StatementRow};
pub use view::{
    BalanceSheetView, CoffeeShopView, Figure, PageView, Presenter, ProfitLossView, RandomChallengeView,
    RatioLine, RatioView, RemediationHint, StageHeader,
};
