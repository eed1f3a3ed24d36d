// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Simple macro to create a [`Result`] with an [`Ok`] variant. It is just syntactic sugar
/// that helps having to write `Ok(())`.
/// - If no arg is passed in then it will return `Ok(())`.
/// - If an arg is passed in then it will return `Ok($arg)`.
#[macro_export]
macro_rules! ok {
    // No args.
    () => {
        Ok(())
    };
    // With arg.
    ($value:expr) => {
        Ok($value)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_ok_macro() {
        let unit: Result<(), ()> = ok!();
        assert_eq!(unit, Ok(()));

        let value: Result<u8, ()> = ok!(42);
        assert_eq!(value, Ok(42));
    }
}
