mod server_client;

pub use server_client::PromotionServerClient;
