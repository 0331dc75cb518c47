pub mod rpc;

pub use rpc::{parse_commitment, SolanaClient, DEFAULT_RPC_URL};
