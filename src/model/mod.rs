pub mod attendance;
pub mod department;
pub mod designation;
pub mod employee;
pub mod leave_request;
pub mod notification;
pub mod role;
