// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helper connection macros

pub use paste::paste;

#[macro_export]
/// Connect an [OutPort](pipebench_engine::port::OutPort) port to an
/// [InPort](pipebench_engine::port::InPort)
///
/// Evaluates to the `SimResult` of the connection.
macro_rules! connect_port {
    ($from:expr, $from_port_name:ident => $to:expr, $to_port_name:ident) => {{
        pipebench_track::debug!($from.entity ; "Connect {}.{} => {}.{}", $from.entity, stringify!($from_port_name), $to.entity, stringify!($to_port_name));
        $crate::connect::paste! {
            $from.[< connect_port_ $from_port_name >]($to.[< port_ $to_port_name >]())
        }
    }};
}

#[macro_export]
/// Connect a tx port stored in a `RefCell<Option<>>`.
macro_rules! connect_tx {
    ($port:expr, $fn:ident ; $port_state:ident) => {
        match $port.borrow_mut().as_mut() {
            Some(port) => port.$fn($port_state),
            None => pipebench_engine::sim_error!("Port connected after the stage started running"),
        }
    };
}

#[macro_export]
/// Access an rx port stored in a `RefCell<Option<>>`.
macro_rules! port_rx {
    ($port:expr, $fn:ident) => {
        match $port.borrow().as_ref() {
            Some(port) => port.$fn(),
            None => pipebench_engine::sim_error!("Port connected after the stage started running"),
        }
    };
}

#[macro_export]
/// Take a variable out of a `RefCell<Option<>>`, returning an error from the
/// enclosing function if it has already been taken.
macro_rules! take_option {
    ($var:expr ; $entity:expr) => {
        match $var.borrow_mut().take() {
            Some(value) => value,
            None => {
                return pipebench_engine::sim_error!(format!("{} run more than once", $entity));
            }
        }
    };
}
