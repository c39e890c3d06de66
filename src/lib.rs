//! # Chirp Server Library
//!
//! This crate provides a Twitter-style social network backend with:
//! - RESTful HTTP API endpoints (posts, comments, reactions, follows, messages)
//! - WebSocket gateway for real-time direct messaging
//! - PostgreSQL for persistent storage
//! - S3 pre-signed URLs for image uploads
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, storage, and metrics implementations
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! chirp_server/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, object storage, and metrics
//! +-- presentation/  HTTP routes and WebSocket gateway
//! +-- shared/        Common utilities (errors, pagination, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
