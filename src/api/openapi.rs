//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, cart_handler, coupon_handler, health_handler, order_handler, product_handler,
    user_handler,
};
use crate::domain::{
    Address, Cart, CartItem, Coupon, CouponInput, CouponQuote, CreateOrder, CustomerSummary,
    NewProduct, OrderDetails, OrderItemInput, OrderItemView, OrderStatus, Product, ProductChanges,
    ProductSort, Tracking, TrackingUpdate, TrackingView, UserResponse, UserRole,
};
use crate::services::{AuthSession, ResetCodeIssued, TokenResponse};

/// OpenAPI documentation for the storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Retail storefront backend: catalog, cart, checkout, order fulfilment and coupons",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Storefront Team", email = "dev@storefront.example.com")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        health_handler::health,
        // Accounts
        auth_handler::register,
        auth_handler::login,
        auth_handler::phone_login,
        auth_handler::check_admin_exists,
        auth_handler::send_reset_code,
        auth_handler::verify_reset_code,
        auth_handler::reset_password,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::list_users,
        user_handler::make_admin,
        user_handler::delete_user,
        // Catalog
        product_handler::list_products,
        product_handler::search_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        // Cart
        cart_handler::get_cart,
        cart_handler::add_to_cart,
        cart_handler::update_cart,
        cart_handler::remove_from_cart,
        cart_handler::clear_cart,
        // Orders
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::track_order,
        order_handler::cancel_order,
        order_handler::request_return,
        order_handler::list_all_orders,
        order_handler::update_status,
        order_handler::delete_order,
        // Coupons
        coupon_handler::validate_coupon,
        coupon_handler::create_coupon,
        coupon_handler::list_coupons,
        coupon_handler::update_coupon,
        coupon_handler::delete_coupon,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            Address,
            Product,
            NewProduct,
            ProductChanges,
            ProductSort,
            Cart,
            CartItem,
            OrderStatus,
            OrderItemInput,
            CreateOrder,
            OrderItemView,
            OrderDetails,
            CustomerSummary,
            Tracking,
            TrackingUpdate,
            TrackingView,
            Coupon,
            CouponInput,
            CouponQuote,
            TokenResponse,
            AuthSession,
            ResetCodeIssued,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::PhoneLoginRequest,
            auth_handler::SendResetCodeRequest,
            auth_handler::VerifyResetCodeRequest,
            auth_handler::ResetPasswordRequest,
            auth_handler::AdminExists,
            user_handler::UpdateProfileRequest,
            user_handler::MakeAdminRequest,
            cart_handler::AddToCartRequest,
            cart_handler::UpdateCartRequest,
            cart_handler::RemoveFromCartRequest,
            order_handler::UpdateStatusRequest,
            coupon_handler::ValidateCouponRequest,
            health_handler::HealthResponse,
            health_handler::ServiceHealth,
            health_handler::ServiceStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Backend connectivity"),
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Users", description = "Profiles and account administration"),
        (name = "Products", description = "Catalog browsing and maintenance"),
        (name = "Cart", description = "The caller's shopping cart"),
        (name = "Orders", description = "Checkout, tracking and fulfilment"),
        (name = "Coupons", description = "Discount codes")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_checkout_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/orders/create"));
        assert!(doc.paths.paths.contains_key("/api/coupons/validate"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
