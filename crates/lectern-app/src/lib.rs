// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod analytics;
pub mod forms;
pub mod ids;
pub mod listing;
pub mod lists;
pub mod model;
pub mod page;
pub mod state;
pub mod validation;

pub use analytics::*;
pub use forms::*;
pub use ids::*;
pub use listing::*;
pub use lists::*;
pub use model::*;
pub use page::*;
pub use state::*;
