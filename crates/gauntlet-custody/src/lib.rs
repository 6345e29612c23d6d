//! Token custody ledger.
//!
//! Stands in for the token-transfer primitive the receiver pays out
//! through. Balances are tracked per `(holder, token)` in storage. Every
//! mutation runs under one async mutex so racing payouts against the same
//! funds are applied one after the other; the loser sees
//! [`CustodyError::InsufficientBalance`].

use alloy_primitives::{Address, U256};
use gauntlet_storage::{StorageError, StorageService};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

const BALANCES_NAMESPACE: &str = "balances";

/// Errors that can occur during custody operations.
#[derive(Debug, Error)]
pub enum CustodyError {
	/// The holder does not have enough of the token.
	#[error("Insufficient balance of {token} for {holder}: available {available}, requested {requested}")]
	InsufficientBalance {
		holder: Address,
		token: Address,
		available: U256,
		requested: U256,
	},
	/// Crediting would overflow the recipient balance.
	#[error("Balance overflow for {holder}")]
	Overflow { holder: Address },
	/// Error from the storage backend.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Balance ledger that executes payouts.
pub struct CustodyService {
	storage: Arc<StorageService>,
	/// Serialises read-modify-write cycles on balances.
	write_lock: Mutex<()>,
}

impl CustodyService {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	fn balance_id(holder: &Address, token: &Address) -> String {
		format!("0x{:x}:0x{:x}", holder, token)
	}

	async fn read_balance(&self, holder: &Address, token: &Address) -> Result<U256, CustodyError> {
		let balance = self
			.storage
			.retrieve_optional::<U256>(BALANCES_NAMESPACE, &Self::balance_id(holder, token))
			.await?;
		Ok(balance.unwrap_or(U256::ZERO))
	}

	async fn write_balance(
		&self,
		holder: &Address,
		token: &Address,
		amount: U256,
	) -> Result<(), CustodyError> {
		self.storage
			.store(BALANCES_NAMESPACE, &Self::balance_id(holder, token), &amount)
			.await?;
		Ok(())
	}

	/// Returns the balance of `token` held by `holder`; unknown entries are zero.
	pub async fn balance_of(&self, holder: Address, token: Address) -> Result<U256, CustodyError> {
		self.read_balance(&holder, &token).await
	}

	/// Credits `amount` of `token` to `holder`.
	pub async fn deposit(
		&self,
		holder: Address,
		token: Address,
		amount: U256,
	) -> Result<U256, CustodyError> {
		let _guard = self.write_lock.lock().await;
		let balance = self
			.read_balance(&holder, &token)
			.await?
			.checked_add(amount)
			.ok_or(CustodyError::Overflow { holder })?;
		self.write_balance(&holder, &token, balance).await?;

		tracing::debug!(%holder, %token, %amount, %balance, "Deposited");
		Ok(balance)
	}

	/// Moves `amount` of `token` from `from` to `to`.
	pub async fn transfer(
		&self,
		from: Address,
		token: Address,
		to: Address,
		amount: U256,
	) -> Result<(), CustodyError> {
		let _guard = self.write_lock.lock().await;

		let available = self.read_balance(&from, &token).await?;
		if available < amount {
			return Err(CustodyError::InsufficientBalance {
				holder: from,
				token,
				available,
				requested: amount,
			});
		}
		if from == to {
			return Ok(());
		}

		let credited = self
			.read_balance(&to, &token)
			.await?
			.checked_add(amount)
			.ok_or(CustodyError::Overflow { holder: to })?;

		self.write_balance(&from, &token, available - amount)
			.await?;
		if let Err(e) = self.write_balance(&to, &token, credited).await {
			// Restore the debit
			if let Err(restore) = self.write_balance(&from, &token, available).await {
				tracing::error!(%from, %token, error = %restore, "Failed to restore debited balance");
			}
			return Err(e);
		}

		tracing::info!(%from, %to, %token, %amount, "Transferred");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use gauntlet_storage::implementations::memory::MemoryStorage;

	fn custody() -> CustodyService {
		CustodyService::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	const RECEIVER: Address = Address::repeat_byte(0x01);
	const TOKEN: Address = Address::repeat_byte(0x02);
	const RECIPIENT: Address = Address::repeat_byte(0x03);

	#[tokio::test]
	async fn test_unknown_balance_is_zero() {
		assert_eq!(
			custody().balance_of(RECEIVER, TOKEN).await.unwrap(),
			U256::ZERO
		);
	}

	#[tokio::test]
	async fn test_transfer_moves_full_balance() {
		let custody = custody();
		let amount = U256::from(100_000_000_000_000_000_000u128);
		custody.deposit(RECEIVER, TOKEN, amount).await.unwrap();

		custody
			.transfer(RECEIVER, TOKEN, RECIPIENT, amount)
			.await
			.unwrap();

		assert_eq!(
			custody.balance_of(RECEIVER, TOKEN).await.unwrap(),
			U256::ZERO
		);
		assert_eq!(
			custody.balance_of(RECIPIENT, TOKEN).await.unwrap(),
			amount
		);
	}

	#[tokio::test]
	async fn test_insufficient_balance_leaves_ledger_untouched() {
		let custody = custody();
		custody
			.deposit(RECEIVER, TOKEN, U256::from(5))
			.await
			.unwrap();

		let err = custody
			.transfer(RECEIVER, TOKEN, RECIPIENT, U256::from(6))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			CustodyError::InsufficientBalance { available, requested, .. }
				if available == U256::from(5) && requested == U256::from(6)
		));
		assert_eq!(
			custody.balance_of(RECEIVER, TOKEN).await.unwrap(),
			U256::from(5)
		);
		assert_eq!(
			custody.balance_of(RECIPIENT, TOKEN).await.unwrap(),
			U256::ZERO
		);
	}

	#[tokio::test]
	async fn test_balances_are_per_token() {
		let custody = custody();
		let other_token = Address::repeat_byte(0x04);
		custody
			.deposit(RECEIVER, TOKEN, U256::from(10))
			.await
			.unwrap();

		assert!(custody
			.transfer(RECEIVER, other_token, RECIPIENT, U256::from(1))
			.await
			.is_err());
	}

	#[tokio::test]
	async fn test_deposit_overflow_rejected() {
		let custody = custody();
		custody.deposit(RECEIVER, TOKEN, U256::MAX).await.unwrap();
		assert!(matches!(
			custody.deposit(RECEIVER, TOKEN, U256::from(1)).await,
			Err(CustodyError::Overflow { .. })
		));
	}

	#[tokio::test]
	async fn test_racing_transfers_pay_once() {
		let custody = Arc::new(custody());
		let amount = U256::from(1_000);
		custody.deposit(RECEIVER, TOKEN, amount).await.unwrap();

		let first = {
			let custody = Arc::clone(&custody);
			tokio::spawn(async move {
				custody
					.transfer(RECEIVER, TOKEN, RECIPIENT, amount)
					.await
			})
		};
		let second = {
			let custody = Arc::clone(&custody);
			let other = Address::repeat_byte(0x05);
			tokio::spawn(async move { custody.transfer(RECEIVER, TOKEN, other, amount).await })
		};

		let results = [first.await.unwrap(), second.await.unwrap()];
		assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
		assert_eq!(
			custody.balance_of(RECEIVER, TOKEN).await.unwrap(),
			U256::ZERO
		);
	}
}
