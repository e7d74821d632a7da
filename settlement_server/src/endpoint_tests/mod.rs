mod checkout;
mod helpers;
mod mocks;
mod orders;
mod pix;
mod webhook;
