pub mod exchange;
pub mod test_node;

pub use exchange::exchange;
pub use session::Session;
pub use test_node::TestNode;
