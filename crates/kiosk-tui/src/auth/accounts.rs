//! Account records with Argon2 password hashes

use std::collections::HashMap;

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use kiosk_core::Role;
use zeroize::Zeroizing;

/// One customer or staff record
#[derive(Debug, Clone)]
pub struct Account {
    pub identity: String,
    pub role: Role,
    /// Balance in RM. `None` means no balance has been recorded yet.
    pub balance: Option<f64>,
    password_hash: String,
}

/// In-memory account directory
#[derive(Debug, Default)]
pub struct AccountBook {
    accounts: HashMap<String, Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts available on a freshly started terminal
    pub fn demo() -> Result<Self> {
        let mut book = Self::new();
        book.register("alice", "pw1", Role::Customer, Some(1523.40))?;
        book.register("bob", "pw2", Role::Customer, None)?;
        book.register("carol", "staff1", Role::Staff, None)?;
        Ok(book)
    }

    /// Add an account, hashing the password with Argon2id
    pub fn register(
        &mut self,
        identity: &str,
        password: &str,
        role: Role,
        balance: Option<f64>,
    ) -> Result<()> {
        let salt = SaltString::generate(&mut OsRng);
        let password_bytes = Zeroizing::new(password.as_bytes().to_vec());

        let password_hash = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        self.accounts.insert(
            identity.to_string(),
            Account {
                identity: identity.to_string(),
                role,
                balance,
                password_hash,
            },
        );
        Ok(())
    }

    /// Check a password. Unknown identities and bad passwords look the same.
    pub fn verify(&self, identity: &str, password: &str) -> Option<&Account> {
        let account = self.accounts.get(identity)?;
        let parsed_hash = PasswordHash::new(&account.password_hash).ok()?;
        let password_bytes = Zeroizing::new(password.as_bytes().to_vec());

        Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .ok()
            .map(|_| account)
    }

    pub fn get(&self, identity: &str) -> Option<&Account> {
        self.accounts.get(identity)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_verify() {
        let mut book = AccountBook::new();
        book.register("alice", "pw1", Role::Customer, Some(10.0)).unwrap();

        let account = book.verify("alice", "pw1").unwrap();
        assert_eq!(account.role, Role::Customer);
        assert_eq!(account.balance, Some(10.0));

        assert!(book.verify("alice", "pw2").is_none());
        assert!(book.verify("mallory", "pw1").is_none());
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let mut book = AccountBook::new();
        book.register("carol", "staff1", Role::Staff, None).unwrap();

        let account = book.get("carol").unwrap();
        assert!(!account.password_hash.contains("staff1"));
        assert!(account.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_demo_book_has_staff() {
        let book = AccountBook::demo().unwrap();
        assert_eq!(book.len(), 3);
        assert_eq!(book.get("carol").map(|a| a.role), Some(Role::Staff));
    }
}
