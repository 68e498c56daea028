pub mod onboarding_service;
pub mod webhook_service;
