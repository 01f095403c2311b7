//! [`Query`] collection related to a single [`Unit`].

use common::operations::By;

use crate::domain::{unit, Unit};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Unit`] by its [`unit::Id`].
pub type ById = DatabaseQuery<By<Option<Unit>, unit::Id>>;
