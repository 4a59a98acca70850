pub mod error;

pub mod config;

pub mod cli;

pub mod logging;

pub mod directory {
    pub mod client;
    pub use client::{
        ContactQuery, ContactRecord, CriterionSpec, DirectoryClient, DirectoryError,
        TransferReport, TransferRequest, UserQuery, UserRecord, UserScope,
    };

    pub mod http;
    pub use http::HttpDirectoryClient;

    pub mod memory;
    pub use memory::InMemoryDirectory;
}

pub mod model {
    pub mod app_state;

    pub mod criteria;
    pub use criteria::{CriteriaRow, CriteriaState, FilterField, Operator, ValueMode};

    pub mod lookup;
    pub use lookup::{LookupField, LookupRow, LookupState, LookupTarget, UserSelection};

    pub mod transfer;
    pub use transfer::{ControlState, TransferOptions, TransferState, WorkflowPhase};

    pub mod ui_state;
    pub use ui_state::{Focus, Overlay, PageMessage, RedrawFlag, Severity, UIState};
}

pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod dispatcher;
    pub use dispatcher::{ActionDispatcher, DispatchResult};

    pub mod event_loop;
    pub use event_loop::{EventLoop, LoopEvent};

    pub mod keymap;
}

pub mod tasks {
    pub mod contact_search;

    pub mod transfer_task;

    pub mod user_search;
}

pub mod view {
    pub mod theme;

    pub mod ui;
    pub use ui::UiRenderer;

    pub mod components {
        pub mod banner;
        pub mod contact_table;
        pub mod criteria_panel;
        pub mod destination_field;
        pub mod help_overlay;
        pub mod lookup_popup;
        pub mod status_bar;
        pub mod transfer_controls;
    }
}

pub use error::AppError;

pub use model::app_state::AppState;
