use rusqlite::{params, OptionalExtension};

use crate::domain::{is_valid_address, Token};
use crate::ports::{RegistryError, TokenRegistry};
use super::store::Database;

impl TokenRegistry for Database {
    fn get(&self, address: &str) -> Result<Option<Token>, RegistryError> {
        let conn = self.conn()?;
        let token = conn
            .query_row(
                "SELECT address, ticker FROM tokens WHERE address = ?1",
                params![address],
                |row| {
                    Ok(Token {
                        address: row.get(0)?,
                        ticker: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn upsert(&self, address: &str, ticker: &str) -> Result<(), RegistryError> {
        if !is_valid_address(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tokens (address, ticker) VALUES (?1, ?2)
             ON CONFLICT(address) DO UPDATE SET ticker = excluded.ticker",
            params![address, ticker],
        )?;
        Ok(())
    }

    fn add_if_absent(&self, address: &str, ticker: &str) -> Result<(), RegistryError> {
        if !is_valid_address(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO tokens (address, ticker) VALUES (?1, ?2)",
            params![address, ticker],
        )?;

        if inserted == 0 {
            return Err(RegistryError::AlreadyExists(address.to_string()));
        }
        Ok(())
    }

    fn remove(&self, address: &str) -> Result<String, RegistryError> {
        let conn = self.conn()?;
        let ticker: Option<String> = conn
            .query_row(
                "DELETE FROM tokens WHERE address = ?1 RETURNING ticker",
                params![address],
                |row| row.get(0),
            )
            .optional()?;

        ticker.ok_or_else(|| RegistryError::NotFound(address.to_string()))
    }

    fn list(&self) -> Result<Vec<Token>, RegistryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT address, ticker FROM tokens ORDER BY rowid")?;
        let tokens = stmt
            .query_map([], |row| {
                Ok(Token {
                    address: row.get(0)?,
                    ticker: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tokens)
    }
}
