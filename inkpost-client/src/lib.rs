mod comment;
pub use comment::{Author, CommentNode};

mod forest;
pub use forest::{Forest, Parent};

mod handle;
pub use handle::SectionHandle;

mod remote;
pub use remote::{ClientConfig, HttpApi};

mod section;
pub use section::{
    Action, ActionKind, ActionState, CommentSection, Completion, Dispatch, PendingAction, Ticket,
    NETWORK_ERROR_MESSAGE,
};

mod viewer;
pub use viewer::Viewer;

pub mod api {
    pub use inkpost_api::*;
}

#[cfg(test)]
mod fuzz;

#[cfg(test)]
mod test_util;
