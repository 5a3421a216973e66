pub mod notification;
pub mod task;
pub mod user;

pub use notification::{Notification, NotificationInput};
pub use task::{
    AssignQuery, Page, Task, TaskAction, TaskHistory, TaskInput, TaskQuery, TaskStatus,
};
pub use user::{ProfileUpdate, User, UserProfile, DEFAULT_ROLE};
