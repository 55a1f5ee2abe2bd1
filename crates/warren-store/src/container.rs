use crate::{Character, Guarded, StoreError};

/// Something that holds cash and has a carrying capacity.
///
/// Each method is a single read-modify-write under the holder's own lock,
/// so two sessions adding cash to the same character never lose an
/// update.
pub trait Container {
    fn cash(&self) -> u64;

    /// Adds to the balance (saturating) and returns the new balance.
    fn add_cash(&self, amount: u64) -> u64;

    /// Removes from the balance and returns the new balance.
    ///
    /// # Errors
    /// [`StoreError::InsufficientCash`] if the balance is smaller than
    /// `amount`; the balance is left as it was.
    fn remove_cash(&self, amount: u64) -> Result<u64, StoreError>;

    fn capacity(&self) -> u64;

    fn set_capacity(&self, capacity: u64);

    /// Summed weight of carried items. Item moves keep it current.
    fn weight(&self) -> u64;
}

impl Container for Guarded<Character> {
    fn cash(&self) -> u64 {
        self.read(|c| c.cash)
    }

    fn add_cash(&self, amount: u64) -> u64 {
        self.write(|c| {
            c.cash = c.cash.saturating_add(amount);
            c.cash
        })
    }

    fn remove_cash(&self, amount: u64) -> Result<u64, StoreError> {
        self.try_write(|c| {
            if c.cash < amount {
                return Err(StoreError::InsufficientCash {
                    have: c.cash,
                    need: amount,
                });
            }
            c.cash -= amount;
            Ok(c.cash)
        })
    }

    fn capacity(&self) -> u64 {
        self.read(|c| c.capacity)
    }

    fn set_capacity(&self, capacity: u64) {
        self.write(|c| c.capacity = capacity);
    }

    fn weight(&self) -> u64 {
        self.read(|c| c.weight)
    }
}
