mod introspection;
mod resolve;
