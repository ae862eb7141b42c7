//! Database models

// Serde helpers
pub mod serde_helpers;

// Identity
pub mod user;

// Workforce
pub mod attendance;
pub mod leave;
pub mod team;

// Collaboration
pub mod conversation;
pub mod message;
pub mod notification;
pub mod task;

// Auth bookkeeping
pub mod token;

// Re-exports
pub use attendance::{
    Attendance, AttendanceStatus, AttendanceUpdate, GeoPoint, Geofence, round_work_hours,
};
pub use conversation::{Conversation, ConversationCreate};
pub use leave::{Leave, LeaveCreate, LeaveStatus, LeaveType, LeaveUpdate};
pub use message::{Message, MessageCreate};
pub use notification::{Notification, NotificationCreate, NotificationType};
pub use task::{Attachment, Comment, Task, TaskCreate, TaskPriority, TaskStatus, TaskUpdate};
pub use team::{Team, TeamCreate, TeamUpdate};
pub use token::RevokedToken;
pub use user::{LeaveBalance, Profile, Role, User, UserCreate, UserId, UserUpdate};
