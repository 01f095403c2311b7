//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use common::operations::{Commit, Transact};
use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        booking, discount, payment, rental_history, unit, user, Booking,
        Discount, Payment, RentalHistory, Unit, User,
    },
    infra::database::{self, Database},
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Mutex<Storage>>);

/// Transactional [`Memory`] client.
///
/// Owns the whole [`Storage`] until committed or dropped, so transactions
/// never interleave. Changes are made on a draft copy and become visible
/// only on [`Commit`].
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Draft>>>);

/// Uncommitted state of a [`Tx`].
#[derive(Debug)]
struct Draft {
    /// Exclusively held [`Storage`] the [`Tx`] was started on.
    origin: OwnedMutexGuard<Storage>,

    /// Modified copy of the `origin`.
    storage: Storage,
}

/// Collections stored by a [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    /// Stored [`User`]s.
    pub(crate) users: HashMap<user::Id, User>,

    /// Stored [`Unit`]s.
    pub(crate) units: HashMap<unit::Id, Unit>,

    /// Stored [`Booking`]s.
    pub(crate) bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Payment`]s.
    pub(crate) payments: HashMap<payment::Id, Payment>,

    /// Stored [`RentalHistory`] records.
    pub(crate) rental_histories: HashMap<rental_history::Id, RentalHistory>,

    /// Stored [`Discount`]s.
    pub(crate) discounts: HashMap<discount::Id, Discount>,
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] was used after [`Commit`].
    #[display("Transaction is already committed")]
    Committed,
}

/// Access to the [`Storage`] behind a [`Memory`] client.
pub trait Access {
    /// Applies the provided function to the [`Storage`].
    ///
    /// # Errors
    ///
    /// If the [`Storage`] is not accessible anymore.
    fn with<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Access for NonTx {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&mut *self.0.lock().await))
    }
}

impl Access for Tx {
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut draft = self.0.lock().await;
        let draft = draft
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::Committed))
            .map_err(tracerr::map_from)?;
        Ok(f(&mut draft.storage))
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let origin = Arc::clone(&self.0 .0).lock_owned().await;
        let storage = origin.clone();
        Ok(Memory(Tx(Arc::new(Mutex::new(Some(Draft {
            origin,
            storage,
        }))))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        if let Some(Draft {
            mut origin,
            storage,
        }) = self.0 .0.lock().await.take()
        {
            *origin = storage;
        }
        Ok(())
    }
}
