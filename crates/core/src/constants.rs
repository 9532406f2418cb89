/// Number of change events kept in the mirror history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// CDC topic carrying row changes of the `job_orders` table.
pub const DEFAULT_CHANGE_TOPIC: &str = "mysql-server.jobdb.job_orders";

/// Consumer group used when subscribing to the change topic.
pub const DEFAULT_CONSUMER_GROUP: &str = "orderwatch-consumer";

/// Payload key used by synthetic (info/error) history entries.
pub const MESSAGE_KEY: &str = "message";
