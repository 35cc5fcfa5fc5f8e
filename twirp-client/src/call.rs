//! Per-call bookkeeping.
//!
//! A call moves through
//! `Created -> Encoding -> Sent -> {DecodingSuccess | DecodingError} -> Done`
//! and may jump to `Done` early from `Encoding` (nothing sent) or `Sent`
//! (no response). It never re-enters a prior state and finishes once.

use std::fmt;
use std::time::{Duration, Instant};

use twirp_client_core::MethodDescriptor;

/// Where a call is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallState {
    Created,
    Encoding,
    Sent,
    DecodingSuccess,
    DecodingError,
    Done,
}

impl CallState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: CallState) -> bool {
        use CallState::*;
        matches!(
            (self, next),
            (Created, Encoding)
                | (Encoding, Sent)
                | (Encoding, Done)
                | (Sent, DecodingSuccess)
                | (Sent, DecodingError)
                | (Sent, Done)
                | (DecodingSuccess, Done)
                | (DecodingError, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == CallState::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallState::Created => "created",
            CallState::Encoding => "encoding",
            CallState::Sent => "sent",
            CallState::DecodingSuccess => "decoding_success",
            CallState::DecodingError => "decoding_error",
            CallState::Done => "done",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight invocation: which method, which server, since when.
#[derive(Debug)]
pub(crate) struct Call<'a> {
    descriptor: &'a MethodDescriptor,
    server_address: &'a str,
    started: Instant,
    state: CallState,
}

impl<'a> Call<'a> {
    pub(crate) fn new(descriptor: &'a MethodDescriptor, server_address: &'a str) -> Self {
        Self {
            descriptor,
            server_address,
            started: Instant::now(),
            state: CallState::Created,
        }
    }

    pub(crate) fn descriptor(&self) -> &'a MethodDescriptor {
        self.descriptor
    }

    pub(crate) fn server_address(&self) -> &'a str {
        self.server_address
    }

    pub(crate) fn state(&self) -> CallState {
        self.state
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn advance(&mut self, next: CallState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal call transition {} -> {} for {} at {}",
            self.state,
            next,
            self.descriptor.procedure(),
            self.server_address,
        );

        #[cfg(feature = "tracing")]
        tracing::trace!(
            rpc.method = %self.descriptor.procedure(),
            server.address = %self.server_address,
            from = %self.state,
            to = %next,
            "call state"
        );

        self.state = next;
    }
}
