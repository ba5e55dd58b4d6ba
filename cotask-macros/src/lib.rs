use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use std::mem::replace;

use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{parse_macro_input, parse_quote, Block, Error, ItemFn, Result, ReturnType, Token, Type};

/// Turns a function returning a handle type into a coroutine.
///
/// The body of the function becomes the body of the coroutine, and the
/// function returns the handle to it:
/// ```rust,ignore
/// #[cotask::coroutine]
/// fn add_one(x: i32) -> cotask::Task<i32> {
///     x + 1
/// }
/// ```
/// Generator bodies name their yielder with the `yielder` argument:
/// ```rust,ignore
/// #[cotask::coroutine(yielder = co)]
/// fn count(n: u32) -> cotask::Generator<u32> {
///     for i in 0..n {
///         co.yield_value(i).await;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn coroutine(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as Args);
    let Coroutine { item, handle } = parse_macro_input!(input);
    let item = transform(item, &handle, args);
    quote!(#item).into()
}

fn transform(mut item: ItemFn, handle: &Type, args: Args) -> ItemFn {
    let block = item.block.clone();
    let new_block: Block = match args.yielder {
        Some(yielder) => parse_quote!({
            <#handle>::new(move |#yielder| async move #block)
        }),
        None => parse_quote!({
            <#handle>::new(async move #block)
        }),
    };
    let _ = replace(&mut item.block, Box::new(new_block));
    item
}

struct Coroutine {
    item: ItemFn,
    handle: Type,
}

struct Args {
    yielder: Option<Ident>,
}

impl Parse for Args {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = Args { yielder: None };

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            let _: Token![=] = input.parse()?;
            if ident == "yielder" {
                if args.yielder.is_some() {
                    return Err(Error::new(
                        ident.span(),
                        "argument `yielder` is defined multiple times",
                    ));
                }
                args.yielder = Some(input.parse()?);
            } else {
                return Err(Error::new(
                    ident.span(),
                    format!("unknown argument \"{ident}\". The only supported argument is `yielder`."),
                ));
            }
            let Ok(_): Result<Token![,]> = input.parse() else {
                break
            };
        }

        if !input.is_empty() {
            return Err(input.error("expected end of input"));
        }

        Ok(args)
    }
}

impl Parse for Coroutine {
    fn parse(input: ParseStream) -> Result<Self> {
        let item: ItemFn = input.parse()?;
        if let Some(asyncness) = item.sig.asyncness {
            return Err(Error::new(
                asyncness.span(),
                "a coroutine is declared as a plain `fn` returning its handle. help: remove `async`.",
            ));
        }
        let ReturnType::Type(_, handle) = &item.sig.output else {
            return Err(Error::new(
                item.sig.span(),
                "expected a return type such as `Task<T>` or `Generator<T>`.",
            ));
        };
        let handle = (**handle).clone();
        Ok(Coroutine { item, handle })
    }
}
