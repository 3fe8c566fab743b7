mod auth;
mod contacts;
mod emails;
mod follow_ups;
mod health_check;
mod helpers;
mod translate;
