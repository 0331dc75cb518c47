use rusqlite::params;

use crate::domain::{is_valid_address, Wallet};
use crate::ports::{RegistryError, WalletRegistry};
use super::store::Database;

impl WalletRegistry for Database {
    fn add(&self, address: &str, name: Option<&str>) -> Result<(), RegistryError> {
        if !is_valid_address(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO wallets (address, name) VALUES (?1, ?2)",
            params![address, name],
        )?;

        if inserted == 0 {
            return Err(RegistryError::AlreadyExists(address.to_string()));
        }
        Ok(())
    }

    fn remove(&self, address: &str) -> Result<(), RegistryError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM wallets WHERE address = ?1", params![address])?;

        if deleted == 0 {
            return Err(RegistryError::NotFound(address.to_string()));
        }
        Ok(())
    }

    fn rename(&self, address: &str, new_name: &str) -> Result<(), RegistryError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE wallets SET name = ?1 WHERE address = ?2",
            params![new_name, address],
        )?;

        if updated == 0 {
            return Err(RegistryError::NotFound(address.to_string()));
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Wallet>, RegistryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT address, name FROM wallets ORDER BY rowid")?;
        let wallets = stmt
            .query_map([], |row| {
                Ok(Wallet {
                    address: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(wallets)
    }
}
