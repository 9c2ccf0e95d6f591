use std::error::Error;

use knuffel::errors::DecodeError;

/// Number that may be written either as an integer or as a decimal literal.
///
/// `MIN` and `MAX` only bound the value at parse time. Whether the value makes sense together
/// with the rest of the configuration is checked when building the conversion parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FloatOrInt<const MIN: i32, const MAX: i32>(pub f64);

impl<const MIN: i32, const MAX: i32> FloatOrInt<MIN, MAX> {
    fn check_range<S: knuffel::traits::ErrorSpan>(
        value: f64,
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Self {
        if (f64::from(MIN)..=f64::from(MAX)).contains(&value) {
            Self(value)
        } else {
            ctx.emit_error(DecodeError::conversion(
                val,
                format!("value must be between {MIN} and {MAX}"),
            ));
            Self::default()
        }
    }
}

impl<S: knuffel::traits::ErrorSpan, const MIN: i32, const MAX: i32> knuffel::DecodeScalar<S>
    for FloatOrInt<MIN, MAX>
{
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let value: Result<f64, Box<dyn Error + Send + Sync>> = match &**val {
            knuffel::ast::Literal::Int(ref value) => {
                i32::try_from(value).map(f64::from).map_err(Into::into)
            }
            knuffel::ast::Literal::Decimal(ref value) => f64::try_from(value).map_err(Into::into),
            _ => {
                ctx.emit_error(DecodeError::unsupported(
                    val,
                    "Unsupported value, only numbers are recognized",
                ));
                return Ok(Self::default());
            }
        };

        match value {
            Ok(value) => Ok(Self::check_range(value, val, ctx)),
            Err(e) => {
                ctx.emit_error(DecodeError::conversion(val, e));
                Ok(Self::default())
            }
        }
    }
}
