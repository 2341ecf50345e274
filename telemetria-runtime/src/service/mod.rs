pub use broadcast::{Broadcaster, Subscriber, SubscriberId};

mod broadcast;
